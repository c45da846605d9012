//! Integration tests: full fetch → score → present pipeline against an
//! in-memory stats source.

mod mock_source;
mod pipeline;
