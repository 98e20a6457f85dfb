mod test_reader;
mod test_writer;
