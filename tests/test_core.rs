use rat_mask::{
    Block, BlockMask, DateMask, Mask, MaskOption, MultiMask, PatternMask, RegexMask, split_at,
};

fn all_masks() -> Result<Vec<Box<dyn Mask>>, anyhow::Error> {
    Ok(vec![
        Box::new(PatternMask::new("(aa) 00-0")),
        Box::new(PatternMask::new("00-00").with_placeholder('_')),
        Box::new(RegexMask::ipv4(true, '0')),
        Box::new(RegexMask::email()),
        Box::new(BlockMask::new(
            ".",
            vec![Block::new('0', 1, 2), Block::new('0', 1, 2)],
        )?),
        Box::new(DateMask::new("yyyy-MM-dd")?.with_placeholder('_')),
        Box::new(MultiMask::new(
            "0000 0000",
            vec![MaskOption::new("short", "00-00", r"^1")?],
        )),
    ])
}

fn assert_caret(m: &dyn Mask) {
    assert!(m.cursor() <= m.len(), "{:?}", m);
    assert_eq!(m.len(), m.text().chars().count(), "{:?}", m);
    if let Some(range) = m.selection() {
        assert!(range.start < range.end, "{:?}", m);
        assert!(range.end <= m.len(), "{:?}", m);
    }
}

#[test]
fn test_split_at() {
    assert_eq!(split_at("12345", -3), ("", "12345"));
    assert_eq!(split_at("12345", 2), ("12", "345"));
    assert_eq!(split_at("12345", 5), ("12345", ""));
    assert_eq!(split_at("12345", 99), ("12345", ""));
}

#[test]
fn test_caret_bounds() -> Result<(), anyhow::Error> {
    for mut m in all_masks()? {
        m.insert("ab12.x@1999");
        assert_caret(m.as_ref());
        m.set_cursor(99);
        assert_caret(m.as_ref());
        m.insert("3");
        assert_caret(m.as_ref());
        m.set_cursor(1);
        m.delete();
        assert_caret(m.as_ref());
        m.backspace();
        assert_caret(m.as_ref());
        m.backspace();
        assert_caret(m.as_ref());
        m.set_selection(99, 1);
        assert_caret(m.as_ref());
        m.insert("7\n");
        assert_caret(m.as_ref());
        m.set_selection(0, 99);
        m.backspace();
        assert_caret(m.as_ref());
        m.set_text("1111-22-33");
        assert_caret(m.as_ref());
        m.set_selection(2, 2);
        m.delete();
        assert_caret(m.as_ref());
        m.clear();
        assert_caret(m.as_ref());
        assert!(!m.delete());
        assert!(!m.backspace());
    }
    Ok(())
}

#[test]
fn test_update_from_none() -> Result<(), anyhow::Error> {
    for mut m in all_masks()? {
        m.insert("1234");
        m.set_selection(1, 3);
        let text = m.text().to_string();
        let cursor = m.cursor();
        let selection = m.selection();

        m.update_from(None);
        assert_eq!(m.text(), text);
        assert_eq!(m.cursor(), cursor);
        assert_eq!(m.selection(), selection);
    }
    Ok(())
}

#[test]
fn test_round_trip() -> Result<(), anyhow::Error> {
    let valid = [
        "(ab) 12-3",
        "12-34",
        "192.168.0.1:8080",
        "john.doe@example.com",
        "1.23",
        "2024-02-29",
        "12-34",
    ];
    for (mut m, valid) in all_masks()?.into_iter().zip(valid) {
        m.insert("garbage");
        m.clear();
        m.insert(valid);
        assert_eq!(m.text(), valid);
        assert_eq!(m.cursor(), m.len());
    }
    Ok(())
}

#[test]
fn test_clone() -> Result<(), anyhow::Error> {
    let masks = all_masks()?;
    let texts = masks
        .iter()
        .map(|v| v.text().to_string())
        .collect::<Vec<_>>();

    let mut copies = masks.clone();
    for m in copies.iter_mut() {
        m.insert("12");
    }
    for (m, text) in masks.iter().zip(texts) {
        assert_eq!(m.text(), text);
        assert_eq!(m.cursor(), 0);
    }
    assert_eq!(copies[1].text(), "12-__");
    assert_eq!(masks[1].text(), "__-__");
    Ok(())
}

#[test]
fn test_display() -> Result<(), anyhow::Error> {
    let mut m = PatternMask::new("000-000");
    m.insert("123456");
    assert_eq!(m.to_string(), "123-456|");
    m.set_cursor(2);
    assert_eq!(m.to_string(), "12|3-456");
    m.set_selection(5, 1);
    assert_eq!(m.to_string(), "1[23-4]56");

    let mut m = DateMask::new("yyyy-MM-dd")?;
    m.insert("2024");
    assert_eq!(format!("{}", m), "2024|");
    Ok(())
}
