use crate::collectors::CommandExecutor;
use crate::utils::errors::MonitoringError;
use async_trait::async_trait;
use log::debug;
use rand::Rng;

/// A fake process reported by [`DummyGpu`].
#[derive(Debug, Clone)]
pub struct DummyProcess {
    pub name: String,
    pub kind: char,
    pub gpu_index: u32,
    pub pid: u32,
}

/// Synthetic executor for machines without an NVIDIA GPU. Ignores the
/// command and renders the configured processes with random utilization.
pub struct DummyGpu {
    pub processes: Vec<DummyProcess>,
}

impl DummyGpu {
    pub fn new(processes: Vec<DummyProcess>) -> Self {
        Self { processes }
    }

    fn render(&self) -> String {
        let mut rng = rand::thread_rng();
        let mut out = String::from("# name type gpu pid sm mem enc dec fb\n# Name C/G Idx # % % % % MB\n");
        for p in &self.processes {
            out.push_str(&format!(
                "{} {} {} {} {} {} {} {} {}\n",
                p.name,
                p.kind,
                p.gpu_index,
                p.pid,
                rng.gen_range(0..=100u32),
                rng.gen_range(0..=100u32),
                rng.gen_range(0..=10u32),
                rng.gen_range(0..=10u32),
                rng.gen_range(64..=8192u32),
            ));
        }
        out
    }
}

impl Default for DummyGpu {
    fn default() -> Self {
        let process = |name: &str, kind, pid| DummyProcess {
            name: name.to_string(),
            kind,
            gpu_index: 0,
            pid,
        };
        Self::new(vec![
            process("Xorg", 'G', 1001),
            process("python", 'C', 1002),
            process("blender", 'G', 1003),
        ])
    }
}

#[async_trait]
impl CommandExecutor for DummyGpu {
    async fn exec(&self, command: &str) -> Result<String, MonitoringError> {
        debug!("Dummy executor ignoring command: {}", command);
        Ok(self.render())
    }
}
