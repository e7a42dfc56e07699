//! Parsing of the arguments following a search command.
//!
//! Forms accepted, in order of precedence:
//!
//! * `next` / `prev` page through the last search
//! * a lone number selects that item of the last search
//! * `<title> -<page>` lists a given page
//! * `<title> <number>` shows a given item
//! * `<title>` lists the first page

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Prev,
    /// Global item number within the last search.
    Select(u32),
    Search {
        keyword: String,
        page: u32,
        item: Option<u32>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("no arguments given")]
    Empty,
}

impl Command {
    pub fn parse(input: &str) -> Result<Self, UsageError> {
        let args = input.split_whitespace().collect::<Vec<_>>();
        let Some(first) = args.first() else {
            return Err(UsageError::Empty);
        };

        match first.to_lowercase().as_str() {
            "next" => return Ok(Command::Next),
            "prev" => return Ok(Command::Prev),
            _ => {}
        }

        if let [single] = args.as_slice() {
            if let Some(number) = number(single) {
                return Ok(Command::Select(number));
            }
        }

        let mut page = 1;
        let mut item = None;
        let mut words = args.as_slice();

        if let [rest @ .., last] = words {
            if !rest.is_empty() {
                if let Some(requested) = last.strip_prefix('-').and_then(number) {
                    page = requested.max(1);
                    words = rest;
                } else if let Some(requested) = number(last) {
                    item = (requested > 0).then_some(requested);
                    words = rest;
                }
            }
        }

        Ok(Command::Search {
            keyword: words.join(" "),
            page,
            item,
        })
    }
}

fn number(arg: &str) -> Option<u32> {
    if arg.is_empty() || !arg.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    arg.parse().ok()
}
