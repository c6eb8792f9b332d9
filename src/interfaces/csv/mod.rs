pub mod order_reader;
pub mod summary_writer;
