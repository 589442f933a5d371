pub mod games;
pub mod input;
pub mod logging;
pub mod storage;
pub mod terminal;
pub mod words;
