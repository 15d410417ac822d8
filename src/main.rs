//! crev: summarize repositories and pull requests with an LLM
//!
//! Stage results are cached on disk, so reruns only do the missing work.

use anyhow::Result;

fn main() -> Result<()> {
    crev::cli::run()
}
