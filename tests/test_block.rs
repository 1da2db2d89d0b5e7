use rat_mask::{Block, BlockMask, Mask, MaskChar, MaskError, PatternMask};

#[test]
fn test_regex() -> Result<(), anyhow::Error> {
    let m = BlockMask::new(
        ".",
        vec![
            Block::new('(', 1, 1),
            Block::new('0', 2, 2),
            Block::new(')', 1, 1),
        ],
    )?;
    assert_eq!(m.mask(), r"^(\(([\.](\d(\d([\.](\))?)?)?)?)?)?$");

    let m = BlockMask::new(
        ".",
        vec![
            Block::new('0', 1, 2),
            Block::new('0', 1, 2),
            Block::new('0', 1, 2),
        ],
    )?;
    assert_eq!(
        m.mask(),
        r"^(\d(\d)?([\.](\d(\d)?([\.](\d(\d)?)?)?)?)?)?$"
    );
    Ok(())
}

#[test]
fn test_errors() {
    assert_eq!(
        BlockMask::new(".", vec![]).map(|_| ()),
        Err(MaskError::NoBlocks)
    );
    assert_eq!(
        BlockMask::new(".", vec![Block::new('0', 2, 1)]).map(|_| ()),
        Err(MaskError::InvalidBlock('0', 2, 1))
    );
    assert_eq!(
        BlockMask::new(".", vec![Block::new('a', 0, 0)]).map(|_| ()),
        Err(MaskError::InvalidBlock('a', 0, 0))
    );
}

#[test]
fn test_insert() -> Result<(), anyhow::Error> {
    let blocks = vec![
        Block::new('0', 1, 2),
        Block::new('0', 1, 2),
        Block::new('0', 1, 2),
    ];

    let mut m = BlockMask::new(".", blocks.clone())?;
    m.insert("1.2.3");
    assert_eq!(m.text(), "1.2.3");

    let mut m = BlockMask::new(".", blocks.clone())?;
    m.insert("123456");
    assert_eq!(m.text(), "12.34.56");
    assert_eq!(m.cursor(), 8);

    assert!(!m.insert("7"));
    assert_eq!(m.text(), "12.34.56");

    let mut m = BlockMask::new(".", blocks)?;
    m.insert("1..2");
    assert_eq!(m.text(), "1.2");
    Ok(())
}

#[test]
fn test_literal_blocks() -> Result<(), anyhow::Error> {
    let mut m = BlockMask::new(
        ".",
        vec![
            Block::new('(', 1, 1),
            Block::new('0', 2, 2),
            Block::new(')', 1, 1),
        ],
    )?;
    m.insert("12");
    assert_eq!(m.text(), "(.12");
    m.insert(")");
    assert_eq!(m.text(), "(.12.)");
    Ok(())
}

#[test]
fn test_letters() -> Result<(), anyhow::Error> {
    let mut m = BlockMask::new("-", vec![Block::new('a', 2, 3), Block::new('0', 1, 4)])?;
    m.insert("abc1234");
    assert_eq!(m.text(), "abc-1234");

    let mut m = BlockMask::new("-", vec![Block::new('a', 2, 3), Block::new('0', 1, 4)])?;
    m.insert("ab12");
    assert_eq!(m.text(), "ab-12");
    Ok(())
}

#[test]
fn test_mask_chars() -> Result<(), anyhow::Error> {
    let mut m = BlockMask::with_mask_chars(
        ":",
        vec![Block::new('h', 2, 2), Block::new('h', 2, 2)],
        vec![MaskChar::regex('h', "[0-9a-f]")?],
    )?;
    assert_eq!(m.mask(), r"^((?:[0-9a-f])((?:[0-9a-f])([:]((?:[0-9a-f])((?:[0-9a-f]))?)?)?)?)?$");
    m.insert("0fxe1");
    assert_eq!(m.text(), "0f:e1");
    Ok(())
}

#[test]
fn test_delete() -> Result<(), anyhow::Error> {
    let mut m = BlockMask::new(".", vec![Block::new('0', 1, 2), Block::new('0', 1, 2)])?
        .with_clean_delimiters(true);
    m.insert("1234");
    assert_eq!(m.text(), "12.34");
    assert_eq!(m.clean_text(), "1234");

    m.set_cursor(1);
    assert!(m.delete());
    assert_eq!(m.text(), "1.34");
    assert_eq!(m.cursor(), 1);

    // a block can't be empty, the delimiter goes too
    assert!(m.backspace());
    assert_eq!(m.text(), "34");
    assert_eq!(m.cursor(), 0);
    Ok(())
}

#[test]
fn test_update_from() -> Result<(), anyhow::Error> {
    let mut m = BlockMask::new(".", vec![Block::new('0', 1, 3), Block::new('0', 1, 3)])?;
    m.insert("123.456");
    assert_eq!(m.text(), "123.456");

    m.update_from(None);
    assert_eq!(m.text(), "123.456");
    m.update_from(Some(&PatternMask::new("000")));
    assert_eq!(m.text(), "123.456");

    let other = BlockMask::new("-", vec![Block::new('0', 1, 2), Block::new('0', 1, 2)])?;
    m.update_from(Some(&other));
    assert_eq!(m.mask(), other.mask());
    assert_eq!(m.delimiters(), "-");
    assert_eq!(m.text(), "12-34");
    Ok(())
}
