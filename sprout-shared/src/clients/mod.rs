pub mod db;
pub mod push;
