//! Performance benchmarks for deplist

use std::io;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use deplist::resolver::constraint::should_build;
use deplist::resolver::source::parse_header;
use deplist::test_utils::{GoTree, go_source};
use deplist::{BuildContext, GoResolver, ImportWalker, Record, RecordSink, WalkConfig};

const GO_SOURCE: &str = r#"// Copyright 2024 The Authors.

//go:build linux && (amd64 || arm64) && !purego

// Package server provides the entry point for the application.
package server

import (
    "context"
    "fmt"
    "net/http"
    "os"

    log "github.com/sirupsen/logrus"
    _ "net/http/pprof"
)

func main() {
    fmt.Println("Hello, world!")
}
"#;

/// Counts records without formatting them.
#[derive(Default)]
struct CountingSink(usize);

impl RecordSink for CountingSink {
    fn write_record(&mut self, _record: &Record) -> io::Result<()> {
        self.0 += 1;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A seed directory importing `width` packages, each of which imports the
/// next layer, `depth` layers deep, plus a few standard library imports.
fn create_layered_tree(width: usize, depth: usize) -> GoTree {
    let tree = GoTree::new();
    for std in ["fmt", "io", "os"] {
        tree.add_goroot_package(std, &go_source(std, &[]));
    }

    let layer = |d: usize| -> Vec<String> {
        (0..width)
            .map(|w| format!("example.com/l{}/p{}", d, w))
            .collect()
    };

    for d in 0..depth {
        let next = if d + 1 < depth { layer(d + 1) } else { Vec::new() };
        for path in layer(d) {
            let mut imports: Vec<&str> = next.iter().map(String::as_str).collect();
            imports.extend(["fmt", "io"]);
            let name = path.rsplit('/').next().unwrap_or("p");
            tree.add_gopath_package(&path, &go_source(name, &imports));
        }
    }

    let first = layer(0);
    let mut imports: Vec<&str> = first.iter().map(String::as_str).collect();
    imports.push("os");
    tree.add_file("work/app/main.go", &go_source("main", &imports));
    tree
}

fn bench_header_parsing(c: &mut Criterion) {
    let ctx = BuildContext::default().with_target("linux", "amd64");
    let mut group = c.benchmark_group("header_parsing");

    group.bench_function("build_constraints", |b| {
        b.iter(|| should_build(black_box(GO_SOURCE), &ctx))
    });

    group.bench_function("imports", |b| b.iter(|| parse_header(black_box(GO_SOURCE))));

    group.finish();
}

fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("walk");

    for (label, width, depth) in [("narrow_deep", 2, 10), ("wide_shallow", 20, 3)] {
        let tree = create_layered_tree(width, depth);
        let app = tree.path("work/app");
        let ctx = tree.context();

        group.bench_function(label, |b| {
            b.iter(|| {
                let mut sink = CountingSink::default();
                let mut walker =
                    ImportWalker::new(GoResolver::new(ctx.clone()), WalkConfig::default());
                walker.run(&[&app], &mut sink).expect("walk failed");
                black_box(sink.0)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_header_parsing, bench_walk);
criterion_main!(benches);
