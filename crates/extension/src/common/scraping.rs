use eyre::eyre;
use regex::Regex;
use scraper::{ElementRef, Selector};

fn compile(selector_str: &str) -> Result<Selector, eyre::Report> {
    Selector::parse(selector_str).map_err(|e| eyre!("Failed to compile selector: {e}"))
}

/// A parsed HTML document.
pub struct Html {
    doc: scraper::Html,
}

impl Html {
    pub fn new(text: &str) -> Self {
        Self {
            doc: scraper::Html::parse_document(text),
        }
    }

    pub fn select(&self, selector_str: &str) -> Result<Vec<Element<'_>>, eyre::Report> {
        let selector = compile(selector_str)?;
        Ok(self.doc.select(&selector).map(Element::from).collect())
    }

    pub fn select_first(&self, selector_str: &str) -> Result<Element<'_>, eyre::Report> {
        self.select_first_opt(selector_str)?
            .ok_or_else(|| eyre!("Element not found: {selector_str}"))
    }

    pub fn select_first_opt(
        &self,
        selector_str: &str,
    ) -> Result<Option<Element<'_>>, eyre::Report> {
        let selector = compile(selector_str)?;
        Ok(self.doc.select(&selector).next().map(Element::from))
    }
}

#[derive(Clone, Copy)]
pub struct Element<'a> {
    pub element: ElementRef<'a>,
}

impl<'a> From<ElementRef<'a>> for Element<'a> {
    fn from(element: ElementRef<'a>) -> Self {
        Self { element }
    }
}

impl<'a> Element<'a> {
    pub fn select(&self, selector_str: &str) -> Result<Vec<Element<'a>>, eyre::Report> {
        let selector = compile(selector_str)?;
        Ok(self.element.select(&selector).map(Element::from).collect())
    }

    pub fn select_first_opt(
        &self,
        selector_str: &str,
    ) -> Result<Option<Element<'a>>, eyre::Report> {
        let selector = compile(selector_str)?;
        Ok(self.element.select(&selector).next().map(Element::from))
    }

    /// Trimmed text content, empty when the element has none.
    pub fn text_or_empty(&self) -> String {
        self.element.text().collect::<String>().trim().to_string()
    }

    /// Trimmed text content, `None` when blank.
    pub fn text_opt(&self) -> Option<String> {
        let text = self.text_or_empty();
        (!text.is_empty()).then_some(text)
    }

    pub fn attr_opt(&self, name: &str) -> Option<String> {
        self.element
            .value()
            .attr(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}

/// First non-empty capture group of the first match, trimmed.
///
/// Patterns with alternations put each alternative in its own group; this
/// returns whichever one participated.
pub fn capture(re: &Regex, text: &str) -> Option<String> {
    let captures = re.captures(text)?;
    captures
        .iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str().trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Every match's capture groups, in order. Groups that did not participate
/// are returned as empty strings.
pub fn capture_all(re: &Regex, text: &str) -> Vec<Vec<String>> {
    re.captures_iter(text)
        .map(|captures| {
            captures
                .iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect()
        })
        .collect()
}
