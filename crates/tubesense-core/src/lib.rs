pub mod comment;
pub mod report;
pub mod sentiment;
pub mod video_id;

pub use comment::{Comment, VideoInfo};
pub use report::{AnalysisReport, Example, LabelCounts, LabelRatios, select_examples, tally};
pub use sentiment::{Prediction, SentimentLabel, SentimentScores};
pub use video_id::{IdentifierError, VideoId};
