pub mod current_user;
pub mod game_id;
pub mod if_match;
pub mod validated_json;

pub use current_user::CurrentUser;
pub use game_id::{GameId, PlayerPathId};
pub use if_match::IfMatch;
pub use validated_json::ValidatedJson;
