mod category;
mod draft;
mod ids;
mod player;
mod question;
mod rank;
mod score_record;

pub use category::{Catalog, CatalogDraft, CatalogError, Category, CategoryDraft, CategoryError};
pub use draft::{AnswerDraft, DraftError, DraftUpdate};
pub use ids::{CategoryId, ParseIdError, QuestionId};
pub use player::{MIN_PLAYER_NAME_CHARS, PlayerName, PlayerNameError};
pub use question::{Question, QuestionDraft, QuestionError, QuestionKind, QuestionType};
pub use rank::{RankTier, percentage};
pub use score_record::{QuestionOutcome, ScoreRecord, ScoreRecordError};
