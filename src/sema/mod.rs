pub mod lower;
