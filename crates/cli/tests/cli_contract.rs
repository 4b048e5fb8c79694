use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use lopdf::{dictionary, Document, Object, Stream};
use predicates::prelude::*;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn cli(data_dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("signplace-cli");
    cmd.env_remove("SIGNPLACE_RENDER_WIDTH")
        .env_remove("SIGNPLACE_MIN_SIZE")
        .env_remove("SIGNPLACE_DATA_DIR")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn write_pdf(dir: &Path, name: &str, page_count: u32) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for _ in 0..page_count {
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 600.into(), 800.into()],
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    doc.save(&path).expect("pdf should be written");
    path
}

fn write_signature_png(dir: &Path) -> PathBuf {
    let path = dir.join("signature.png");
    image::RgbaImage::from_pixel(8, 4, image::Rgba([20, 20, 20, 255]))
        .save(&path)
        .expect("png should be written");
    path
}

fn write_script(dir: &Path, script: &Value) -> PathBuf {
    let path = dir.join("script.json");
    std::fs::write(&path, serde_json::to_vec(script).expect("script json")).expect("write script");
    path
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout should contain valid json")
}

fn drag_script() -> Value {
    json!({
        "steps": [
            { "action": "pointer_down", "target": "overlay", "x": 200, "y": 150 },
            { "action": "pointer_move", "x": 150, "y": 80 },
            { "action": "pointer_release" },
            { "action": "confirm" }
        ]
    })
}

#[test]
fn info_emits_stable_json_contract() {
    let temp = TempDir::new().expect("temp dir should be created");
    let pdf = write_pdf(temp.path(), "blank.pdf", 2);

    let mut value = stdout_json(cli(temp.path()).arg("info").arg(&pdf));
    value["path"] = Value::String("<FIXTURE>".to_owned());

    insta::assert_json_snapshot!("cli_info_blank_pdf", value);
}

#[test]
fn info_fails_for_missing_file() {
    let temp = TempDir::new().expect("temp dir should be created");

    cli(temp.path())
        .arg("info")
        .arg(temp.path().join("missing.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("file does not exist"));
}

#[test]
fn info_fails_for_invalid_pdf() {
    let temp = TempDir::new().expect("temp dir should be created");
    let path = temp.path().join("invalid.pdf");
    std::fs::write(&path, b"this is not a pdf").expect("write");

    cli(temp.path())
        .arg("info")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open PDF"));
}

#[test]
fn info_fails_for_encrypted_marker_pdf() {
    let temp = TempDir::new().expect("temp dir should be created");
    let path = write_pdf(temp.path(), "encrypted.pdf", 1);
    let mut bytes = std::fs::read(&path).expect("read");
    bytes.extend_from_slice(b"\n% /Encrypt\n");
    std::fs::write(&path, bytes).expect("write");

    cli(temp.path())
        .arg("info")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("encrypted PDFs are not supported"));
}

#[test]
fn render_page_uses_configured_width() {
    let temp = TempDir::new().expect("temp dir should be created");
    let pdf = write_pdf(temp.path(), "blank.pdf", 2);
    let output_path = temp.path().join("out/page.png");

    cli(temp.path())
        .arg("render-page")
        .arg(&pdf)
        .arg("--page")
        .arg("2")
        .arg("--output")
        .arg(&output_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("page.png"));

    let image = image::open(&output_path).expect("page should be readable image");
    assert_eq!((image.width(), image.height()), (300, 400));
}

#[test]
fn render_page_width_can_come_from_env() {
    let temp = TempDir::new().expect("temp dir should be created");
    let pdf = write_pdf(temp.path(), "blank.pdf", 1);
    let output_path = temp.path().join("page.png");

    cli(temp.path())
        .env("SIGNPLACE_RENDER_WIDTH", "120")
        .arg("render-page")
        .arg(&pdf)
        .arg("--output")
        .arg(&output_path)
        .assert()
        .success();

    let image = image::open(&output_path).expect("page should be readable image");
    assert_eq!((image.width(), image.height()), (120, 160));
}

#[test]
fn render_page_rejects_page_past_end() {
    let temp = TempDir::new().expect("temp dir should be created");
    let pdf = write_pdf(temp.path(), "blank.pdf", 2);

    cli(temp.path())
        .arg("render-page")
        .arg(&pdf)
        .arg("--page")
        .arg("3")
        .assert()
        .failure()
        .stderr(predicate::str::contains("page 3 is not in the document"));
}

#[test]
fn render_page_rejects_page_zero() {
    let temp = TempDir::new().expect("temp dir should be created");
    let pdf = write_pdf(temp.path(), "blank.pdf", 1);

    cli(temp.path())
        .arg("render-page")
        .arg(&pdf)
        .arg("--page")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("1-based"));
}

#[test]
fn invalid_env_config_is_reported() {
    let temp = TempDir::new().expect("temp dir should be created");

    cli(temp.path())
        .env("SIGNPLACE_RENDER_WIDTH", "wide")
        .arg("version")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}

#[test]
fn store_signature_rejects_non_images() {
    let temp = TempDir::new().expect("temp dir should be created");
    let path = temp.path().join("notes.txt");
    std::fs::write(&path, b"hello").expect("write");

    cli(temp.path())
        .arg("store-signature")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized image format"));
}

#[test]
fn clear_signature_reports_whether_one_was_stored() {
    let temp = TempDir::new().expect("temp dir should be created");
    let png = write_signature_png(temp.path());

    cli(temp.path())
        .arg("clear-signature")
        .assert()
        .success()
        .stdout(predicate::str::contains("no signature stored"));

    cli(temp.path())
        .arg("store-signature")
        .arg(&png)
        .assert()
        .success()
        .stdout(predicate::str::contains("image/png"));

    cli(temp.path())
        .arg("clear-signature")
        .assert()
        .success()
        .stdout(predicate::str::contains("signature cleared"));
}

#[test]
fn place_without_signature_hides_overlay() {
    let temp = TempDir::new().expect("temp dir should be created");
    let pdf = write_pdf(temp.path(), "blank.pdf", 2);
    let script = write_script(
        temp.path(),
        &json!({
            "steps": [
                { "action": "pointer_down", "target": "overlay", "x": 200, "y": 150 },
                { "action": "pointer_move", "x": 150, "y": 80 },
                { "action": "pointer_release" }
            ]
        }),
    );

    let value = stdout_json(cli(temp.path()).arg("place").arg(&pdf).arg("--script").arg(&script));

    assert_eq!(value["has_overlay"], json!(false));
    assert_eq!(value["transform"]["position"], json!({ "x": 100.0, "y": 100.0 }));
    assert_eq!(value["confirmed"], Value::Null);
}

#[test]
fn place_drag_and_confirm_hands_off_placement() {
    let temp = TempDir::new().expect("temp dir should be created");
    let pdf = write_pdf(temp.path(), "blank.pdf", 2);
    let png = write_signature_png(temp.path());
    let script = write_script(temp.path(), &drag_script());

    cli(temp.path()).arg("store-signature").arg(&png).assert().success();

    let value = stdout_json(cli(temp.path()).arg("place").arg(&pdf).arg("--script").arg(&script));
    insta::assert_json_snapshot!("place_drag_and_confirm", value);

    let last = stdout_json(cli(temp.path()).arg("last-placement"));
    assert_eq!(last, value["confirmed"]);
}

#[test]
fn place_navigates_pages_and_resizes() {
    let temp = TempDir::new().expect("temp dir should be created");
    let pdf = write_pdf(temp.path(), "blank.pdf", 2);
    let png = write_signature_png(temp.path());
    let script = write_script(
        temp.path(),
        &json!({
            "viewport": { "left": 10, "top": 10, "width": 500, "height": 500 },
            "steps": [
                { "action": "next_page" },
                { "action": "next_page" },
                { "action": "pointer_down", "target": "resize_handle", "x": 310, "y": 210 },
                { "action": "pointer_move", "x": 120, "y": 120 },
                { "action": "pointer_release" },
                { "action": "confirm" }
            ]
        }),
    );

    cli(temp.path()).arg("store-signature").arg(&png).assert().success();

    let value = stdout_json(cli(temp.path()).arg("place").arg(&pdf).arg("--script").arg(&script));

    assert_eq!(value["page_label"], json!("Page 2 of 2"));
    assert_eq!(value["transform"]["size"], json!({ "width": 50.0, "height": 50.0 }));
    assert_eq!(value["confirmed"]["page_number"], json!(2));
    assert_eq!(value["routes"], json!(["/request-loan/confirmation"]));
}

#[test]
fn place_rotation_is_relative_to_press_angle() {
    let temp = TempDir::new().expect("temp dir should be created");
    let pdf = write_pdf(temp.path(), "blank.pdf", 1);
    let png = write_signature_png(temp.path());
    // Overlay center is (200, 150): the press sits below it, the move to its right.
    let script = write_script(
        temp.path(),
        &json!({
            "steps": [
                { "action": "pointer_down", "target": "rotate_handle", "x": 200, "y": 250 },
                { "action": "pointer_move", "x": 300, "y": 150 }
            ]
        }),
    );

    cli(temp.path()).arg("store-signature").arg(&png).assert().success();

    let value = stdout_json(cli(temp.path()).arg("place").arg(&pdf).arg("--script").arg(&script));

    let rotation = value["transform"]["rotation_degrees"].as_f64().expect("rotation is a number");
    assert!((rotation + 90.0).abs() < 1e-9, "rotation was {rotation}");
    assert_eq!(value["transform"]["position"], json!({ "x": 100.0, "y": 100.0 }));
    assert_eq!(value["mode"], json!("rotating"));
    assert_eq!(value["cursor"], json!("pointer"));
}

#[test]
fn place_drops_moves_without_container_geometry() {
    let temp = TempDir::new().expect("temp dir should be created");
    let pdf = write_pdf(temp.path(), "blank.pdf", 1);
    let png = write_signature_png(temp.path());
    let script = write_script(
        temp.path(),
        &json!({
            "steps": [
                { "action": "pointer_down", "target": "overlay", "x": 200, "y": 150 },
                { "action": "set_viewport", "viewport": null },
                { "action": "pointer_move", "x": 150, "y": 80 }
            ]
        }),
    );

    cli(temp.path()).arg("store-signature").arg(&png).assert().success();

    let value = stdout_json(cli(temp.path()).arg("place").arg(&pdf).arg("--script").arg(&script));

    assert_eq!(value["transform"]["position"], json!({ "x": 100.0, "y": 100.0 }));
    assert_eq!(value["mode"], json!("dragging"));
    assert_eq!(value["cursor"], json!("grabbing"));
}

#[test]
fn min_size_below_fifty_is_rejected() {
    let temp = TempDir::new().expect("temp dir should be created");
    let pdf = write_pdf(temp.path(), "blank.pdf", 1);
    let script = write_script(temp.path(), &json!({ "steps": [] }));

    cli(temp.path())
        .env("SIGNPLACE_MIN_SIZE", "10")
        .arg("place")
        .arg(&pdf)
        .arg("--script")
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("SIGNPLACE_MIN_SIZE"));
}

#[test]
fn place_rejects_page_outside_document() {
    let temp = TempDir::new().expect("temp dir should be created");
    let pdf = write_pdf(temp.path(), "blank.pdf", 2);
    let script = write_script(temp.path(), &json!({ "steps": [] }));

    cli(temp.path())
        .arg("place")
        .arg(&pdf)
        .arg("--script")
        .arg(&script)
        .arg("--page")
        .arg("5")
        .assert()
        .failure()
        .stderr(predicate::str::contains("page 5 is not in the document"));
}

#[test]
fn version_prints_package_version() {
    let temp = TempDir::new().expect("temp dir should be created");

    cli(temp.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
