pub mod idex;
