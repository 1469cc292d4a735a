use recmatch_table::Record;

/// One scored (incoming, master) pairing.
///
/// Borrows both records from the sources that produced it, so results live
/// no longer than the master and incoming sources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult<'a> {
    pub incoming: &'a Record,
    pub master: &'a Record,
    pub score: f64,
}

impl<'a> MatchResult<'a> {
    pub fn new(incoming: &'a Record, master: &'a Record, score: f64) -> Self {
        Self {
            incoming,
            master,
            score,
        }
    }
}
