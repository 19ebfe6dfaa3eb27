pub mod completion;
pub mod import_prompt;
pub mod mastery_bar;
pub mod question_card;
