use super::*;
use crate::host::MemoryHost;

fn host_for(route: Route) -> MemoryHost {
    let viewport = Viewport::new(1280.0, 720.0).unwrap();
    let scene = route_scene(route, viewport);
    let mut host = MemoryHost::new(viewport);
    for (id, rect) in scene.elements {
        host.insert(id, rect);
    }
    host
}

#[test]
fn navigation_resets_scroll_and_injects_metadata() {
    let mut site = Site::new(host_for(Route::Home), "https://scrollyte.dev");
    assert_eq!(site.navigate("/").unwrap(), Route::Home);
    assert_eq!(site.mounted().len(), 4);
    assert!(site.mounted().iter().all(|m| m.degraded().is_none()));

    site.host_mut().set_scroll_y(300.0);
    site.tick(0.0);
    assert_eq!(site.host().pinned_count(), 1);

    assert_eq!(site.navigate("/about").unwrap(), Route::About);
    assert_eq!(site.host().scroll(), (0.0, 0.0));
    assert_eq!(site.host().title(), "About | Scrollyte");
    assert_eq!(site.host().canonical(), Some("https://scrollyte.dev/about"));
    assert_eq!(site.host().pinned_count(), 0);
}

#[test]
fn leaving_a_page_releases_its_listeners_and_frames() {
    let mut site = Site::new(host_for(Route::Home), "https://scrollyte.dev");
    site.navigate("/").unwrap();
    let mut now = 0.0;
    for y in [0.0, 1500.0, 4000.0, 7000.0] {
        site.host_mut().set_scroll_y(y);
        site.tick(now);
        now += 0.5;
    }
    site.unmount();
    assert_eq!(site.route(), None);
    assert_eq!(site.engine().live_handles(), 0);
    assert_eq!(site.host().listener_count(), 0);
    assert_eq!(site.host().active_frames(), 0);
}

#[test]
fn unknown_location_keeps_the_current_page() {
    let mut site = Site::new(host_for(Route::Home), "https://scrollyte.dev");
    site.navigate("/").unwrap();
    assert!(site.navigate("/nope").is_err());
    assert_eq!(site.route(), Some(Route::Home));
    assert_eq!(site.mounted().len(), 4);
}

#[test]
fn static_site_mounts_without_motion() {
    let mut site = Site::without_motion(host_for(Route::Home), "https://scrollyte.dev");
    assert!(!site.is_animated());
    site.navigate("/").unwrap();
    site.host_mut().set_scroll_y(900.0);
    let report = site.tick(0.0);
    assert_eq!(report.writes, 0);
    assert_eq!(site.host().write_count(), 0);
    assert_eq!(site.host().listener_count(), 0);
    assert_eq!(site.host().title(), Route::Home.seo().title);
}
