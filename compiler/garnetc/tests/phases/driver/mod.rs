//! Driver tests: the `garnet` command's arguments and checker output.

mod check;
