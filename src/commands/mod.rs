pub mod check;
pub mod crawl;
pub mod init;
