/// Yearly reading-challenge state for the current user.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ReadingChallenge {
    pub year: i32,
    pub goal: u32,
    pub books_read: u32,
    pub joined: bool,
}

impl ReadingChallenge {
    pub fn percent_done(&self) -> u32 {
        match self.goal {
            0 => 0,
            goal => (self.books_read * 100 / goal).min(100),
        }
    }
}
