use std::fs;
use std::path::PathBuf;

use pagesnap::rendering::BoxRasterizer;
use pagesnap::{scrub_colors, sync_styles, ColorNormalizer, NodeId, RasterImage, RasterOptions, Rasterizer, StyleTree};

fn golden_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("tests/goldens/expected");
    p.push(name);
    p
}

fn render_fixture(name: &str) -> RasterImage {
    let json = fs::read_to_string(format!("tests/fixtures/{}.json", name)).expect("read fixture");
    let live = StyleTree::from_json(&json).expect("valid snapshot");
    let root = live.root().unwrap();

    let normalizer = ColorNormalizer::new();
    let mut hook = |l: &StyleTree, lr: NodeId, c: &mut StyleTree, cr: NodeId| {
        sync_styles(l, lr, c, cr, &normalizer);
        scrub_colors(c, cr, &normalizer);
    };
    let options = RasterOptions::default();
    futures::executor::block_on(BoxRasterizer::new().rasterize(&live, root, &options, &mut hook))
        .expect("rasterize")
}

#[test]
fn golden_raster_matches_fixture() {
    let image = render_fixture("golden_layout");
    assert_eq!((image.width(), image.height()), (120, 80));

    let expected_path = golden_path("layout.sha256");
    if std::env::var("UPDATE_GOLDENS").is_ok() {
        fs::create_dir_all("tests/goldens/expected").ok();
        fs::write(&expected_path, format!("{}\n", image.digest())).expect("write golden");
        println!("Updated golden: {:?}", expected_path);
        return;
    }

    let exp = fs::read_to_string(&expected_path)
        .unwrap_or_else(|e| panic!("missing golden {:?} ({}); run with UPDATE_GOLDENS=1", expected_path, e));
    let exp_bytes = hex::decode(exp.trim()).expect("invalid hex in golden");
    assert_eq!(hex::decode(image.digest()).unwrap(), exp_bytes);
}

#[test]
fn dashboard_raster_is_deterministic() {
    let first = render_fixture("dashboard");
    let again = render_fixture("dashboard");
    assert_eq!(first.digest(), again.digest());
    // footer #1f2937 at scale 2
    assert_eq!(first.pixels().get_pixel(10, 1180).0, [0x1f, 0x29, 0x37, 255]);
}
