//! Integration tests for channel-release
//!
//! Each test drives the real binary inside a throwaway git repository with
//! stub build-runner and registry-client scripts, feeding confirmation
//! answers through stdin.

mod helpers;
mod test_release;
