use serde::Deserialize;
use std::{collections::BTreeMap, env, fs, path::PathBuf};

const DEFAULT_BOARD: &str = "jetson-nano";

#[derive(Deserialize)]
struct Board {
    label: String,
    led_pin: u32,
    switch_pin: u32,
    debounce_ms: u32,
}

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let board_name = env::var("GPIODEV_BOARD").unwrap_or_else(|_| String::from(DEFAULT_BOARD));
    let boards_path = PathBuf::from(manifest_dir).join("../../boards.json");
    let boards_str = fs::read_to_string(&boards_path).unwrap();
    let boards: BTreeMap<String, Board> = serde_json::from_str(&boards_str).unwrap();
    let board = match boards.get(board_name.as_str()) {
        Some(board) => board,
        None => panic!("Unknown board '{}'.", board_name),
    };
    make_board(board_name.as_str(), board);
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=../../boards.json");
    println!("cargo:rerun-if-env-changed=GPIODEV_BOARD");
}

fn make_board(name: &str, board: &Board) {
    let mut s = String::new();
    s += format!("/// Board this build targets.\npub const BOARD_NAME: &str = {:?};\n", name).as_str();
    s += format!("/// Label used when claiming GPIO lines.\npub const BOARD_LABEL: &str = {:?};\n", board.label).as_str();
    s += format!("/// Line driving the LED.\npub const LED_PIN: u32 = {};\n", board.led_pin).as_str();
    s += format!("/// Line sampling the switch.\npub const SWITCH_PIN: u32 = {};\n", board.switch_pin).as_str();
    s += format!("/// Debounce applied to the switch line, in milliseconds.\npub const DEBOUNCE_MS: u32 = {};\n", board.debounce_ms).as_str();
    let out_dir = env::var("OUT_DIR").unwrap();
    let path = PathBuf::from(out_dir).join("board.rs");
    fs::write(path, s).unwrap();
}
