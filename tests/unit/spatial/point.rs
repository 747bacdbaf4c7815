use super::*;

#[test]
fn pack_unpack_roundtrip_boundaries() {
    let values = [i32::MIN, i32::MIN + 1, -1, 0, 1, i32::MAX - 1, i32::MAX];
    for &x in &values {
        for &y in &values {
            assert_eq!(Point::unpack(Point::pack(x, y)), (x, y), "({x}, {y})");
            let p = Point::new(x, y);
            assert_eq!((p.x(), p.y()), (x, y));
            assert_eq!(Point::from_packed(p.packed()), p);
        }
    }
}

#[test]
fn distinct_coordinates_pack_distinctly() {
    assert_ne!(Point::pack(0, -1), Point::pack(-1, 0));
    assert_ne!(Point::pack(1, 0), Point::pack(0, 1));
}

#[test]
fn debug_shows_coordinates() {
    assert_eq!(format!("{:?}", Point::new(-2, 5)), "Point(-2, 5)");
}
