mod common;

use std::sync::Arc;
use std::thread;

use common::{RecordingSurface, one_hot_grid};
use fenge::overlay::OverlayRenderer;

#[test]
fn producers_and_renderer_run_concurrently() {
  let overlay = Arc::new(
    OverlayRenderer::builder()
      .palette_seed(Some(11))
      .build()
      .expect("renderer"),
  );

  let inference = {
    let overlay = overlay.clone();
    thread::spawn(move || {
      for t in 0..200 {
        let class = 1 + (t as usize % 20);
        overlay.track_results(one_hot_grid(21, &[&[class, 0], &[0, class]]), t);
      }
    })
  };

  let camera = {
    let overlay = overlay.clone();
    thread::spawn(move || {
      for i in 0..200 {
        let rotation = if i % 2 == 0 { 0 } else { 90 };
        overlay.set_frame_configuration(640, 480, rotation);
      }
    })
  };

  for _ in 0..200 {
    let mut surface = RecordingSurface::new(320, 240);
    let stats = overlay.draw(&mut surface).expect("draw");
    // 每份结果都恰好有两个前景单元
    assert!(stats.cells_painted == 0 || stats.cells_painted == 2);
    if stats.cells_painted == 2 {
      let rects = surface.rects();
      assert_eq!(rects[0].1.color, rects[1].1.color);
    }
  }

  inference.join().unwrap();
  camera.join().unwrap();

  let snapshot = overlay.snapshot();
  assert_eq!(snapshot.timestamp, 199);
  assert_eq!(snapshot.geometry.rotation_degrees, 90);
}

#[test]
fn snapshot_taken_before_update_is_unchanged() {
  let overlay = OverlayRenderer::builder().build().expect("renderer");
  overlay.set_frame_configuration(10, 10, 0);
  overlay.track_results(one_hot_grid(21, &[&[1]]), 1);

  let before = overlay.snapshot();
  overlay.set_frame_configuration(20, 20, 90);
  overlay.track_results(one_hot_grid(21, &[&[2]]), 2);

  assert_eq!(before.geometry.width, 10);
  assert_eq!(before.timestamp, 1);
  let results = before.results.as_deref().expect("results");
  assert_eq!(results.class_at(0, 0, 0), Some(1));

  let mut surface = RecordingSurface::new(10, 10);
  let stats = overlay.draw_snapshot(&before, &mut surface).expect("draw");
  assert_eq!(stats.cells_painted, 1);
  assert_eq!(surface.rects()[0].1.color, overlay.palette()[1]);
}
