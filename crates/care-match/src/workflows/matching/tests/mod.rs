mod common;
mod guard;
mod search;
