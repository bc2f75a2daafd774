pub mod help;
pub mod pagetest;
pub mod pick;
