use image::{Rgb, RgbImage};
use postcard_render::{
    CARD_OFFSETS, SheetSide, Uprn, compose_sheet, flip_group, parse_sheet_filename, save_sheet,
    sheet_filename,
};

fn group() -> [Uprn; 4] {
    [
        Uprn::from("200010001"),
        Uprn::from("200010002"),
        Uprn::from("200010003"),
        Uprn::from("200010004"),
    ]
}

fn card(shade: u8) -> RgbImage {
    RgbImage::from_pixel(20, 20, Rgb([shade, shade, shade]))
}

#[test]
fn both_sides_name_the_original_order() {
    let group = group();

    // The address side uses the group as-is; the calendar side renders the
    // pair-swapped ordering but the filename must still carry the original.
    let addr_name = sheet_filename(&group, SheetSide::Address).unwrap();
    let cal_name = sheet_filename(&group, SheetSide::Calendar).unwrap();

    let (addr_uprns, addr_side) = parse_sheet_filename(&addr_name).unwrap();
    let (cal_uprns, cal_side) = parse_sheet_filename(&cal_name).unwrap();

    assert_eq!(addr_uprns, group);
    assert_eq!(cal_uprns, group);
    assert_eq!(addr_side, SheetSide::Address);
    assert_eq!(cal_side, SheetSide::Calendar);

    // Same name apart from the side tag, so the two sheets of a group pair up
    assert_eq!(
        addr_name.trim_end_matches("addr.jpg"),
        cal_name.trim_end_matches("cal.jpg")
    );
}

#[test]
fn calendar_cards_land_swapped_but_keep_the_name() {
    let group = group();
    let blank = RgbImage::from_pixel(2700, 1950, Rgb([255, 255, 255]));

    // Cards rendered in the calendar side's grid order: the pair swap puts
    // the second record top-left
    let swapped = flip_group(&group);
    let cards = [card(10), card(20), card(30), card(40)];
    let sheet = compose_sheet(&cards, &blank);

    assert_eq!(swapped[0], group[1]);
    assert_eq!(*sheet.get_pixel(CARD_OFFSETS[0].0, CARD_OFFSETS[0].1), Rgb([10, 10, 10]));

    // The name never reflects the swap
    let name = sheet_filename(&group, SheetSide::Calendar).unwrap();
    assert!(name.starts_with("200010001-200010002-200010003-200010004"));
}

#[test]
fn saved_sheet_lands_in_the_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let blank = RgbImage::from_pixel(2700, 1950, Rgb([255, 255, 255]));
    let cards = [card(1), card(2), card(3), card(4)];

    let sheet = compose_sheet(&cards, &blank);
    let name = sheet_filename(&group(), SheetSide::Address).unwrap();
    let path = save_sheet(&sheet, &name, dir.path(), 95).unwrap();

    assert!(path.exists());
    assert_eq!(path.parent().unwrap(), dir.path());
    // Persisted as a JPEG
    let reloaded = image::open(&path).unwrap().to_rgb8();
    assert_eq!(reloaded.dimensions(), (2700, 1950));
}
