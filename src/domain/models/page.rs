/// One server page of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Token of the following page, `None` on the last one
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_page_token: Option<String>) -> Self {
        Self {
            items,
            next_page_token,
        }
    }

    /// A final page with no items
    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }

    pub fn is_last(&self) -> bool {
        self.next_page_token.is_none()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}
