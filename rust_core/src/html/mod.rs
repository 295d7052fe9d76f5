//! HTML table extraction and game log location.

pub mod game_log;
pub mod tables;

pub use game_log::{
    locate_and_clean, select_table, ColumnMap, GameLogColumn, GameLogTable, GameRow,
    GAME_LOG_MEANS,
};
pub use tables::{parse_tables, strip_comment_markers, RawTable};
