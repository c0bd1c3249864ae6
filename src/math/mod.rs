pub mod prob;
