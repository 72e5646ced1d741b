use fenge::frame::FrameGeometry;

#[test]
fn unrotated_frame_scales_to_fit() {
  let lb = FrameGeometry::new(320, 240, 0).letterbox(480, 360);
  assert!(!lb.rotated);
  assert_eq!(lb.multiplier, 1.5);
  assert_eq!((lb.width, lb.height), (480, 360));
}

#[test]
fn rotated_frame_swaps_dimensions() {
  let lb = FrameGeometry::new(320, 240, 90).letterbox(480, 360);
  assert!(lb.rotated);
  assert_eq!(lb.multiplier, 1.125);
  assert_eq!((lb.width, lb.height), (270, 360));
}

#[test]
fn multiplier_is_largest_that_fits() {
  let cases = [
    (FrameGeometry::new(640, 480, 0), (1080, 1920)),
    (FrameGeometry::new(640, 480, 90), (1080, 1920)),
    (FrameGeometry::new(257, 257, 270), (300, 200)),
    (FrameGeometry::new(100, 300, 180), (50, 50)),
  ];

  for (geometry, (sw, sh)) in cases {
    let lb = geometry.letterbox(sw, sh);
    let (ew, eh) = geometry.effective_size();
    let (fw, fh) = (lb.multiplier * ew as f32, lb.multiplier * eh as f32);
    let eps = 1e-3;
    assert!(fw <= sw as f32 + eps && fh <= sh as f32 + eps, "{geometry:?}");
    assert!(
      (fw - sw as f32).abs() < eps || (fh - sh as f32).abs() < eps,
      "{geometry:?}"
    );
  }
}

#[test]
fn cell_geometry_uses_grid_shape() {
  let lb = FrameGeometry::new(320, 240, 0).letterbox(480, 360);
  assert_eq!(lb.cell_half_extent(4, 4), (120.0, 90.0));
  assert_eq!(lb.cell_center(2, 2, 4, 4), (240.0, 180.0));
  assert_eq!(lb.cell_center(0, 0, 4, 4), (0.0, 0.0));
}
