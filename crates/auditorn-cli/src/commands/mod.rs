pub mod completion;
pub mod prompt;
pub mod run;
