//! Encodings for moving user state across boundaries: compact share links and
//! full JSON backups.

pub mod backup;
pub mod share;

pub use backup::{decode_backup, encode_backup, BackupDocument};
pub use share::{
    consume_share_param, decode_compact, encode_compact, qr_code_url, share_url, ConsumedLink,
    SharedConfig, SHARE_PARAM,
};
