mod basic;
mod errors;
mod fallback;
mod streaming;
mod tools;
