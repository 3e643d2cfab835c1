/// Scored outcome returned by the platform for one submission.
///
/// The backend owns scoring; the session controller only carries the
/// verdict around.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizResult {
    pub score_percent: f64,
    pub passed: bool,
}
