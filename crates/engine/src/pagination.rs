//! Conversion between global item numbers and (page, offset) pairs.

use novelscout_types::PAGE_SIZE;

/// Where a global item number lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPosition {
    /// 1-based upstream page.
    pub page: u32,
    /// 0-based offset within that page.
    pub index: usize,
}

/// Locates the 1-based global item `number`. Zero has no position.
pub fn locate(number: u32) -> Option<ItemPosition> {
    let zero_based = number.checked_sub(1)?;
    Some(ItemPosition {
        page: zero_based / PAGE_SIZE + 1,
        index: (zero_based % PAGE_SIZE) as usize,
    })
}

/// Global number of the first item on `page`.
pub fn first_number(page: u32) -> u32 {
    page.saturating_sub(1) * PAGE_SIZE + 1
}
