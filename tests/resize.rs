use flag_shader::camera::PerspectiveCamera;
use flag_shader::viewport::{capped_pixel_ratio, Viewport};
use flag_shader::DemoConfig;

#[test]
fn aspect_and_output_size_follow_every_resize() {
    let config = DemoConfig::default();
    let mut camera = PerspectiveCamera::new(&config.camera, 1.0);
    let mut viewport = Viewport::new(1.0, 1.0, 1.0, config.max_pixel_ratio);

    let events = [
        (1920.0, 1080.0, 1.0),
        (1080.0, 1920.0, 3.0),
        (375.0, 667.0, 2.0),
        (2560.0, 1440.0, 1.5),
        (640.0, 480.0, 0.75),
    ];

    for &(w, h, dpr) in &events {
        let size = viewport.resize(w, h, dpr, config.max_pixel_ratio, &mut camera);
        assert_eq!(camera.aspect, (w / h) as f32);
        assert_eq!((size.css_width as f64, size.css_height as f64), (w, h));

        let ratio = capped_pixel_ratio(dpr, 2.0);
        assert_eq!(viewport.pixel_ratio, dpr.min(2.0));
        assert_eq!(size.buffer_width, (w * ratio).floor() as u32);
        assert_eq!(size.buffer_height, (h * ratio).floor() as u32);
    }
}
