use fenge::palette::{ColorPalette, Gradient};
use image::Rgb;

fn sorted(colors: &[Rgb<u8>]) -> Vec<[u8; 3]> {
  let mut v: Vec<_> = colors.iter().map(|c| c.0).collect();
  v.sort();
  v
}

#[test]
fn gradient_is_deterministic() {
  let gradient = Gradient::default();
  assert_eq!(gradient.colors(21), gradient.colors(21));
  assert_eq!(gradient.color(0), Rgb([128, 243, 32]));
}

#[test]
fn gradient_follows_sine_waves() {
  let gradient = Gradient::default();
  for i in 0..21 {
    let expected = |phase: f32| ((0.2 * i as f32 + phase).sin() * 127.0 + 128.0).round() as u8;
    assert_eq!(
      gradient.color(i),
      Rgb([expected(0.0), expected(2.0), expected(4.0)])
    );
  }
}

#[test]
fn shuffle_is_a_permutation() {
  let gradient = Gradient::default();
  let palette = ColorPalette::generate(&gradient, 21, None);
  assert_eq!(palette.len(), 21);
  assert_eq!(sorted(palette.as_slice()), sorted(&gradient.colors(21)));
}

#[test]
fn seeded_shuffle_is_reproducible() {
  let gradient = Gradient::default();
  let a = ColorPalette::generate(&gradient, 21, Some(7));
  let b = ColorPalette::generate(&gradient, 21, Some(7));
  assert_eq!(a, b);
  assert_eq!(a[3], b[3]);
  assert_eq!(a.get(21), None);
}
