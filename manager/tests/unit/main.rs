mod support;
mod test_lifecycle;
