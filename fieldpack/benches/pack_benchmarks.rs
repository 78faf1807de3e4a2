use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use redlilium_fieldpack::{
    ConfigNode, NodeError, NodeLoadable, PackedFields, SerializableFields,
    SerializationCallbacks, fields_of, pack, unpack,
};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Helper types
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Thrusters {
    nozzles: Vec<f32>,
}

impl NodeLoadable for Thrusters {
    fn load(&mut self, node: &ConfigNode) -> Result<(), NodeError> {
        self.nozzles.clear();
        for raw in node.get_values("nozzle") {
            let nozzle = raw.parse::<f32>().map_err(|e| NodeError::InvalidValue {
                key: "nozzle".into(),
                value: raw.to_owned(),
                message: e.to_string(),
            })?;
            self.nozzles.push(nozzle);
        }
        Ok(())
    }

    fn save(&self, node: &mut ConfigNode) {
        for nozzle in &self.nozzles {
            node.add_value("nozzle", nozzle);
        }
    }
}

#[derive(Default, Clone, Serialize, Deserialize)]
struct Telemetry {
    samples: Vec<[f32; 3]>,
}

#[derive(SerializableFields, Default)]
struct Vessel {
    #[serialize_field]
    config: Option<ConfigNode>,
    #[serialize_field]
    thrusters: Option<Thrusters>,
    #[serialize_field]
    telemetry: Option<Telemetry>,
    #[serialize_field]
    stage: u32,
    #[packed_fields]
    packed: PackedFields,
}

fn sample_vessel() -> Vessel {
    let mut config = ConfigNode::new("PART");
    config.add_value("name", "liquidEngine");
    for i in 0..16 {
        let module = config.add_node(ConfigNode::new("MODULE"));
        module.add_value("name", format!("Module{i}"));
        module.add_value("rate", i as f32 * 0.5);
    }
    Vessel {
        config: Some(config),
        thrusters: Some(Thrusters {
            nozzles: (0..8).map(|i| i as f32 * 12.5).collect(),
        }),
        telemetry: Some(Telemetry {
            samples: (0..256).map(|i| [i as f32, 0.0, -1.0]).collect(),
        }),
        stage: 3,
        packed: PackedFields::default(),
    }
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_fields_of_cached(c: &mut Criterion) {
    fields_of::<Vessel>();
    c.bench_function("fields_of_cached", |b| {
        b.iter(|| black_box(fields_of::<Vessel>().len()));
    });
}

fn bench_pack(c: &mut Criterion) {
    let vessel = sample_vessel();
    c.bench_function("pack_mixed_fields", |b| {
        b.iter(|| black_box(pack(black_box(&vessel)).unwrap()));
    });
}

fn bench_unpack(c: &mut Criterion) {
    let packed = pack(&sample_vessel()).unwrap();
    c.bench_function("unpack_into_fresh_instance", |b| {
        b.iter_batched(
            Vessel::default,
            |mut vessel| {
                unpack(&mut vessel, &packed).unwrap();
                black_box(vessel);
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_lifecycle_round_trip(c: &mut Criterion) {
    c.bench_function("before_serialize_after_deserialize", |b| {
        b.iter_batched(
            sample_vessel,
            |mut vessel| {
                vessel.on_before_serialize().unwrap();
                vessel.on_after_deserialize().unwrap();
                black_box(vessel);
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_node_text(c: &mut Criterion) {
    let config = sample_vessel().config.unwrap_or_default();
    let text = config.to_text();
    c.bench_function("config_node_to_text", |b| {
        b.iter(|| black_box(config.to_text()));
    });
    c.bench_function("config_node_parse", |b| {
        b.iter(|| black_box(ConfigNode::parse_first(black_box(&text)).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_fields_of_cached,
    bench_pack,
    bench_unpack,
    bench_lifecycle_round_trip,
    bench_node_text,
);
criterion_main!(benches);
