mod failures;
mod materialize;
mod queries;
