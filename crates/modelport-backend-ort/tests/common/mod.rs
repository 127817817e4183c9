//! Builds ONNX fixtures in memory so no binary models are checked in.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

const ONNX_FLOAT: u64 = 1;

fn varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

fn field_varint(buf: &mut Vec<u8>, field: u64, value: u64) {
    varint(buf, field << 3);
    varint(buf, value);
}

fn field_bytes(buf: &mut Vec<u8>, field: u64, bytes: &[u8]) {
    varint(buf, (field << 3) | 2);
    varint(buf, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// `ValueInfoProto` for an f32 tensor; `None` dims are symbolic.
fn value_info(name: &str, dims: &[Option<u64>]) -> Vec<u8> {
    let mut shape = Vec::new();
    for dim in dims {
        let mut encoded = Vec::new();
        match dim {
            Some(value) => field_varint(&mut encoded, 1, *value),
            None => field_bytes(&mut encoded, 2, b"batch"),
        }
        field_bytes(&mut shape, 1, &encoded);
    }

    let mut tensor_type = Vec::new();
    field_varint(&mut tensor_type, 1, ONNX_FLOAT);
    field_bytes(&mut tensor_type, 2, &shape);

    let mut type_proto = Vec::new();
    field_bytes(&mut type_proto, 1, &tensor_type);

    let mut info = Vec::new();
    field_bytes(&mut info, 1, name.as_bytes());
    field_bytes(&mut info, 2, &type_proto);
    info
}

/// Serialized `ModelProto` with a single `Identity` node, `x: [batch, width] -> y`.
pub fn identity_model_bytes(width: u64) -> Vec<u8> {
    let mut node = Vec::new();
    field_bytes(&mut node, 1, b"x");
    field_bytes(&mut node, 2, b"y");
    field_bytes(&mut node, 3, b"identity");
    field_bytes(&mut node, 4, b"Identity");

    let mut graph = Vec::new();
    field_bytes(&mut graph, 1, &node);
    field_bytes(&mut graph, 2, b"identity_graph");
    field_bytes(&mut graph, 11, &value_info("x", &[None, Some(width)]));
    field_bytes(&mut graph, 12, &value_info("y", &[None, Some(width)]));

    let mut opset = Vec::new();
    field_varint(&mut opset, 2, 13);

    let mut model = Vec::new();
    field_varint(&mut model, 1, 8);
    field_bytes(&mut model, 2, b"modelport-tests");
    field_bytes(&mut model, 7, &graph);
    field_bytes(&mut model, 8, &opset);
    model
}

pub fn write_identity_model(dir: &Path, width: u64) -> Result<PathBuf> {
    let path = dir.join("identity.onnx");
    fs::write(&path, identity_model_bytes(width))?;
    Ok(path)
}
