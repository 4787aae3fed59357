// Here's the list of the FTP commands implemented
pub mod cwd;
pub mod list;
pub mod mdtm;
pub mod noop;
pub mod pass;
pub mod pwd;
pub mod quit;
pub mod rein;
pub mod retr;
pub mod size;
pub mod stor;
pub mod syst;
pub mod type_;
pub mod user;

pub mod error;
pub mod ftpcommand;
pub mod handlers;

// The utils and common functions are here
pub mod utils;
