pub mod payload;
pub mod qr_code;
pub mod record;
