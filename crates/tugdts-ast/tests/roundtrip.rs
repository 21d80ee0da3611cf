// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Canonical fixtures must print back byte for byte.

use std::path::PathBuf;

use tugdts_ast::{parse_source, render_file};

fn all_fixtures() -> impl Iterator<Item = (PathBuf, String)> {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");

    let mut paths: Vec<PathBuf> = path
        .read_dir()
        .expect("read_dir")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|p| p.to_string_lossy().ends_with(".d.ts"))
        .collect();
    paths.sort();
    paths.into_iter().map(|path| {
        let contents = std::fs::read_to_string(&path).expect("reading file");
        (path, contents)
    })
}

#[test]
fn roundtrip_fixtures() {
    let mut count = 0;
    for (path, input) in all_fixtures() {
        let name = path.display().to_string();
        let file = match parse_source(name.as_str(), input.as_str()) {
            Ok(file) => file,
            Err(e) => panic!("{}", e.snippet),
        };
        assert_eq!(render_file(&file), input, "roundtrip mismatch for {}", name);
        count += 1;
    }
    assert!(count >= 3, "expected fixtures, found {}", count);
}

#[test]
fn rendering_is_a_fixed_point() {
    let messy = "export declare class A<T>extends B{constructor(a:number)\n  m ( x ?: T ) : void\n}";
    let first = render_file(&parse_source("m.d.ts", messy).unwrap());
    let second = render_file(&parse_source("m.d.ts", first.as_str()).unwrap());
    assert_eq!(first, second);
    assert_eq!(
        first,
        "export declare class A<T> extends B {\n    constructor(a: number);\n    m(x?: T): void;\n}\n"
    );
}
