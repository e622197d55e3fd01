use crate::error::{Result, VoiceError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use hound::{SampleFormat, WavReader};
use std::path::Path;
use std::sync::{mpsc, Arc, Mutex};

/// 音频播放
pub trait MediaPlayer: Send + Sync {
    /// 播放音频文件，替换正在播放的内容
    fn play(&self, source: &Path) -> Result<()>;
    fn stop(&self) -> Result<()>;
}

/// 解码后的单声道音频
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// 播放控制指令
enum PlayerCommand {
    Play(Vec<f32>),
    Stop,
}

/// 播放状态，输出回调与播放线程共享
#[derive(Default)]
struct Playback {
    samples: Vec<f32>,
    position: usize,
}

impl Playback {
    fn is_playing(&self) -> bool {
        self.position < self.samples.len()
    }

    /// 新的 Play 整段替换当前音频并从头播放；Stop 清空
    fn apply(&mut self, cmd: PlayerCommand) {
        match cmd {
            PlayerCommand::Play(samples) => {
                self.samples = samples;
                self.position = 0;
                log::info!("开始播放");
            }
            PlayerCommand::Stop => {
                self.samples.clear();
                self.position = 0;
                log::info!("停止播放");
            }
        }
    }

    /// 填充交错的输出缓冲：单声道样本复制到所有声道，播完补静音
    fn fill(&mut self, data: &mut [f32], channels: usize) {
        for frame in data.chunks_mut(channels.max(1)) {
            let sample = self.samples.get(self.position).copied().unwrap_or(0.0);
            if self.is_playing() {
                self.position += 1;
            }
            frame.fill(sample);
        }
    }
}

/// 全进程共用一个播放器：一次只播放一段音频，新的 play 覆盖旧的
pub struct AudioPlayer {
    cmd_tx: mpsc::Sender<PlayerCommand>,
    playback: Arc<Mutex<Playback>>,
    /// 输出设备采样率
    sample_rate: u32,
}

impl AudioPlayer {
    /// 启动播放线程（cpal::Stream 不是 Send，需要专用线程）
    pub fn start() -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<PlayerCommand>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<std::result::Result<u32, String>>(1);
        let playback = Arc::new(Mutex::new(Playback::default()));

        let shared = playback.clone();
        std::thread::spawn(move || {
            let stream = match build_output_stream(shared.clone()) {
                Ok((stream, rate)) => {
                    let _ = ready_tx.send(Ok(rate));
                    stream
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            // 等待控制指令
            loop {
                match cmd_rx.recv() {
                    Ok(cmd) => shared.lock().unwrap_or_else(|e| e.into_inner()).apply(cmd),
                    Err(_) => {
                        // 发送端已关闭，退出线程
                        log::info!("播放线程退出");
                        break;
                    }
                }
            }
            drop(stream);
        });

        let sample_rate = ready_rx
            .recv()
            .map_err(|e| VoiceError::Playback(format!("播放线程启动失败: {e}")))?
            .map_err(VoiceError::Playback)?;

        Ok(Self {
            cmd_tx,
            playback,
            sample_rate,
        })
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .lock()
            .map(|pb| pb.is_playing())
            .unwrap_or(false)
    }

    fn send(&self, cmd: PlayerCommand) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|e| VoiceError::Playback(format!("发送播放指令失败: {e}")))
    }
}

impl MediaPlayer for AudioPlayer {
    fn play(&self, source: &Path) -> Result<()> {
        let clip = decode_wav(source)?;
        log::debug!(
            "{}: {} 个样本 @ {}Hz",
            source.display(),
            clip.samples.len(),
            clip.sample_rate
        );
        self.send(PlayerCommand::Play(resample(&clip, self.sample_rate)))
    }

    fn stop(&self) -> Result<()> {
        self.send(PlayerCommand::Stop)
    }
}

/// 关闭播放时使用
pub struct NullPlayer;

impl MediaPlayer for NullPlayer {
    fn play(&self, source: &Path) -> Result<()> {
        log::debug!("播放已关闭，跳过: {}", source.display());
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        Ok(())
    }
}

fn build_output_stream(
    playback: Arc<Mutex<Playback>>,
) -> std::result::Result<(cpal::Stream, u32), String> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or("未找到扬声器设备")?;

    let supported_config = device
        .default_output_config()
        .map_err(|e| format!("获取扬声器配置失败: {e}"))?;

    let sample_rate = supported_config.sample_rate().0;
    let channels = supported_config.channels();
    let config = cpal::StreamConfig {
        channels,
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                match playback.lock() {
                    Ok(mut pb) => pb.fill(data, channels as usize),
                    Err(_) => data.fill(0.0),
                }
            },
            |err| {
                log::error!("音频流错误: {err}");
            },
            None,
        )
        .map_err(|e| format!("创建音频流失败: {e}"))?;

    stream
        .play()
        .map_err(|e| format!("启动音频流失败: {e}"))?;

    Ok((stream, sample_rate))
}

/// 读取 WAV 文件并转为单声道 f32 样本
pub fn decode_wav(path: &Path) -> Result<Clip> {
    let mut reader = WavReader::open(path)
        .map_err(|e| VoiceError::Playback(format!("打开 {} 失败: {e}", path.display())))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| VoiceError::Playback(format!("读取 WAV 样本失败: {e}")))?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| VoiceError::Playback(format!("读取 WAV 样本失败: {e}")))?
        }
    };

    // 多声道转单声道
    let channels = spec.channels.max(1) as usize;
    let samples = if channels > 1 {
        interleaved
            .chunks(channels)
            .map(|chunk| chunk.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        interleaved
    };

    Ok(Clip {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// 线性插值转换采样率
pub fn resample(clip: &Clip, target_rate: u32) -> Vec<f32> {
    if clip.sample_rate == target_rate || clip.sample_rate == 0 || clip.samples.is_empty() {
        return clip.samples.clone();
    }

    let ratio = clip.sample_rate as f64 / target_rate as f64;
    let out_len = (clip.samples.len() as f64 / ratio).round() as usize;
    let last = clip.samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = (pos.floor() as usize).min(last);
            let next = (idx + 1).min(last);
            let frac = (pos - idx as f64) as f32;
            clip.samples[idx] * (1.0 - frac) + clip.samples[next] * frac
        })
        .collect()
}
