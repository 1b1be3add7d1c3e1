pub mod tfl;
