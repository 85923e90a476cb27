mod common;
mod course;
