//! Scripted sessions through the replay module

use quickfit::error::Result;
use quickfit::replay::{parse_script, Outcome, Replay};
use quickfit::{AllocatorConfig, BlockId, QuickFitAllocator};

const REFERENCE_SCRIPT: &str = "\
# reference driver sequence
alloc 16
alloc 32
alloc 16
status
free 16 0
status
alloc 16
status
";

#[test]
fn test_reference_script() -> Result<()> {
    let mut allocator = QuickFitAllocator::with_config(AllocatorConfig::default())?;
    let commands = parse_script(REFERENCE_SCRIPT)?;
    let outcomes = Replay::new(&mut allocator).run(&commands);

    let reports: Vec<String> = outcomes
        .iter()
        .filter(|o| matches!(o, Outcome::Status(_)))
        .map(|o| o.to_string())
        .collect();
    assert_eq!(reports.len(), 3);
    assert!(reports[0].contains("Size 16 - Free: 0, Used: 2"));
    assert!(reports[1].contains("Size 16 - Free: 1, Used: 1"));
    assert!(reports[2].contains("Size 16 - Free: 0, Used: 2"));

    assert!(matches!(
        outcomes[6],
        Outcome::Allocated { size: 16, id } if id == BlockId::new(0)
    ));
    Ok(())
}

#[test]
fn test_capacity_failure_is_reported() -> Result<()> {
    let config = AllocatorConfig::with_sizes(&[32]).max_blocks_per_class(1);
    let mut allocator = QuickFitAllocator::with_config(config)?;
    let commands = parse_script("alloc 32\nalloc 32\nfree 32 0\nalloc 32\n")?;

    let outcomes = Replay::new(&mut allocator).run(&commands);
    assert!(outcomes[1].to_string().starts_with("Error: Out of memory"));
    assert!(matches!(outcomes[3], Outcome::Allocated { size: 32, .. }));
    Ok(())
}
