mod common;

use common::*;
use pcie_lx::{
    err::Error, regs::*, Bank, InboundType, LittleEndian, OutboundType, PciAddress, WindowState,
    WindowType,
};

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;
const TIB: u64 = 1024 * GIB;

const MEM: WindowType = WindowType::Outbound(OutboundType::Memory);
const IB_MEM: WindowType = WindowType::Inbound(InboundType::MemoryFetchable);

#[test]
fn index_at_capacity_is_rejected() {
    let mut r = rc::<LittleEndian>();
    for (bank, ty) in [(Bank::Outbound, MEM), (Bank::Inbound, IB_MEM)] {
        assert_eq!(
            r.ctrl.configure_window(bank, PAB_WINS_NUM, ty, 0, 0, MIB),
            Err(Error::IndexOutOfRange {
                index: PAB_WINS_NUM,
                capacity: PAB_WINS_NUM
            })
        );
    }
    assert_eq!(r.ccsr.writes(), 0);
}

#[test]
fn last_index_is_accepted() {
    let mut r = rc::<LittleEndian>();
    r.ctrl
        .configure_window(Bank::Outbound, PAB_WINS_NUM - 1, MEM, 0x40_0000_0000, 0, MIB)
        .unwrap();
    r.ctrl
        .configure_window(Bank::Inbound, PAB_WINS_NUM - 1, IB_MEM, 0, 0x1_0000_0000, MIB)
        .unwrap();
    assert!(r.ctrl.window(Bank::Outbound, PAB_WINS_NUM - 1).unwrap().enabled);
    assert!(r.ctrl.window(Bank::Inbound, PAB_WINS_NUM - 1).unwrap().enabled);
}

#[test]
fn sizes_survive_the_hardware() {
    let mut r = rc::<LittleEndian>();
    for (i, size) in [8 * KIB, MIB, 4 * GIB, TIB].into_iter().enumerate() {
        let local = 0x100_0000_0000 * (i as u64 + 1);
        r.ctrl
            .configure_window(Bank::Outbound, i, MEM, local, size, size)
            .unwrap();
        assert_eq!(
            r.ctrl.window(Bank::Outbound, i).unwrap(),
            WindowState {
                enabled: true,
                window_type: Some(MEM),
                local_base: local,
                remote_base: size,
                size,
            }
        );
    }
}

#[test]
fn outbound_registers_are_split() {
    let mut r = rc::<LittleEndian>();
    r.ctrl
        .configure_window(Bank::Outbound, 3, MEM, 0x88_4000_0000, 0x12_c000_0000, GIB)
        .unwrap();

    let ctrl = r.ccsr.reg(pab_axi_amap_ctrl(3));
    assert_eq!(ctrl & 0x7, 1 | (OutboundType::Memory as u32) << 1);
    assert_eq!(ctrl >> 10, (!(GIB - 1) as u32) >> 10);
    assert_eq!(r.ccsr.reg(pab_ext_axi_amap_size(3)), 0xffff_ffff);
    assert_eq!(r.ccsr.reg(pab_axi_amap_axi_win(3)), 0x4000_0000);
    assert_eq!(r.ccsr.reg(pab_ext_axi_amap_axi_win(3)), 0x88);
    assert_eq!(r.ccsr.reg(pab_axi_amap_pex_win_l(3)), 0xc000_0000);
    assert_eq!(r.ccsr.reg(pab_axi_amap_pex_win_h(3)), 0x12);
}

#[test]
fn inbound_registers() {
    let mut r = rc::<LittleEndian>();
    let ty = WindowType::Inbound(InboundType::MemoryNonFetchable);
    r.ctrl
        .configure_window(Bank::Inbound, 1, ty, 0x8000_0000, 0x8000_0000, 2 * GIB)
        .unwrap();

    assert_eq!(r.ccsr.reg(pab_pex_amap_ctrl(1)) & 0x7, 1 | 0x3 << 1);
    assert_eq!(r.ccsr.reg(pab_ext_pex_amap_size(1)), 0xffff_ffff);
    assert_eq!(r.ccsr.reg(pab_pex_amap_axi_win(1)), 0x8000_0000);
    assert_eq!(r.ccsr.reg(pab_pex_amap_pex_win_l(1)), 0x8000_0000);
    assert_eq!(r.ctrl.window(Bank::Inbound, 1).unwrap().window_type, Some(ty));
    assert!(!r.ctrl.window(Bank::Outbound, 1).unwrap().enabled);
}

#[test]
fn control_update_keeps_reserved_bits() {
    let mut r = rc::<LittleEndian>();
    r.ccsr.set(pab_axi_amap_ctrl(7), 0x3f8);
    r.ctrl
        .configure_window(Bank::Outbound, 7, MEM, 0, 0, 64 * KIB)
        .unwrap();
    assert_eq!(r.ccsr.reg(pab_axi_amap_ctrl(7)) & 0x3f8, 0x3f8);
}

#[test]
fn failed_calls_leave_window_untouched() {
    let mut r = rc::<LittleEndian>();
    r.ctrl
        .configure_window(Bank::Outbound, 5, MEM, 0x40_0000_0000, 0, MIB)
        .unwrap();
    let before = r.ctrl.window(Bank::Outbound, 5).unwrap();
    r.ccsr.clear_log();

    assert_eq!(
        r.ctrl.configure_window(Bank::Outbound, 5, MEM, 0, 0, 3 * MIB),
        Err(Error::InvalidSize(3 * MIB))
    );
    assert_eq!(
        r.ctrl.configure_window(Bank::Outbound, 5, MEM, 0, 0, 512),
        Err(Error::InvalidSize(512))
    );
    assert!(matches!(
        r.ctrl.configure_window(Bank::Outbound, 5, IB_MEM, 0, 0, MIB),
        Err(Error::InvalidConfiguration(_))
    ));
    assert!(matches!(
        r.ctrl.configure_window(Bank::Outbound, 5, MEM, 0x1000, 0, MIB),
        Err(Error::InvalidConfiguration(_))
    ));
    assert_eq!(r.ccsr.writes(), 0);
    assert_eq!(r.ctrl.window(Bank::Outbound, 5).unwrap(), before);
}

#[test]
fn last_write_wins_on_the_same_index() {
    let mut r = rc::<LittleEndian>();
    r.ctrl
        .configure_window(Bank::Outbound, 2, MEM, 0x40_0000_0000, 0, MIB)
        .unwrap();
    let io = WindowType::Outbound(OutboundType::Io);
    r.ctrl
        .configure_window(Bank::Outbound, 2, io, 0x50_0000_0000, 0, 64 * KIB)
        .unwrap();

    let win = r.ctrl.window(Bank::Outbound, 2).unwrap();
    assert_eq!(win.window_type, Some(io));
    assert_eq!(win.local_base, 0x50_0000_0000);
    assert_eq!(win.size, 64 * KIB);
}

#[test]
fn disable_clears_only_enable() {
    let mut r = rc::<LittleEndian>();
    r.ctrl
        .configure_window(Bank::Inbound, 0, IB_MEM, 0, 0, 4 * GIB)
        .unwrap();
    let before = r.ctrl.window(Bank::Inbound, 0).unwrap();

    r.ctrl.disable_window(Bank::Inbound, 0).unwrap();
    let after = r.ctrl.window(Bank::Inbound, 0).unwrap();
    assert!(!after.enabled);
    assert_eq!(WindowState { enabled: true, ..after }, before);

    assert!(r.ctrl.disable_window(Bank::Inbound, PAB_WINS_NUM).is_err());
}

#[test]
fn config_window_carries_target() {
    let mut r = rc::<LittleEndian>();
    let target = PciAddress::new(0, 1, 0, 0);
    r.ctrl
        .configure_config_window(0, CFG_BASE, CFG_SIZE, target)
        .unwrap();

    assert_eq!(r.ccsr.reg(pab_axi_amap_pex_win_l(0)), 1 << 24);
    let win = r.ctrl.window(Bank::Outbound, 0).unwrap();
    assert_eq!(win.window_type, Some(OutboundType::Config.into()));
    assert_eq!(win.config_target(), Some(target));

    let next = PciAddress::new(0, 2, 0x1f, 7);
    r.ctrl.retarget_config_window(0, next).unwrap();
    assert_eq!(r.ccsr.reg(pab_axi_amap_pex_win_l(0)), 2 << 24 | 0x1f << 19 | 7 << 16);
    assert_eq!(r.ctrl.window(Bank::Outbound, 0).unwrap().config_target(), Some(next));
}

#[test]
fn retarget_refuses_memory_windows() {
    let mut r = rc::<LittleEndian>();
    r.ctrl
        .configure_window(Bank::Outbound, 1, MEM, 0x40_0000_0000, 0, MIB)
        .unwrap();
    r.ccsr.clear_log();
    assert!(matches!(
        r.ctrl.retarget_config_window(1, PciAddress::new(0, 1, 0, 0)),
        Err(Error::InvalidConfiguration(_))
    ));
    assert_eq!(r.ccsr.writes(), 0);
    assert!(r.ctrl.window(Bank::Outbound, 1).unwrap().config_target().is_none());
}

/// Offset inside the CCSR aperture that `offset` is reached through.
fn aperture_offset(offset: usize) -> usize {
    if offset < INDIRECT_ADDR_BNDRY {
        offset
    } else {
        INDIRECT_ADDR_BNDRY | (offset & PAGE_ADDR_MASK)
    }
}

#[test]
fn control_register_is_written_last() {
    let mut r = rc::<LittleEndian>();
    for (bank, ty, ctrl) in [
        (Bank::Outbound, MEM, pab_axi_amap_ctrl(3)),
        (Bank::Inbound, IB_MEM, pab_pex_amap_ctrl(3)),
    ] {
        r.ccsr.clear_log();
        r.ctrl
            .configure_window(bank, 3, ty, 0x88_4000_0000, 0x12_c000_0000, GIB)
            .unwrap();

        let data: Vec<_> = r
            .ccsr
            .log()
            .into_iter()
            .filter_map(|a| match a {
                Access::Write(off, v) if off != PAB_CTRL => Some((off, v)),
                _ => None,
            })
            .collect();
        assert_eq!(data.len(), 6, "{bank}");
        let (last, value) = data[data.len() - 1];
        assert_eq!(last, aperture_offset(ctrl), "{bank}");
        assert_eq!(value & 1, 1, "{bank}");
        assert!(data[..5].iter().all(|(off, _)| *off != last), "{bank}");
    }
}

#[test]
fn retarget_refuses_unprogrammed_windows() {
    let mut r = rc::<LittleEndian>();
    assert!(matches!(
        r.ctrl.retarget_config_window(4, PciAddress::new(0, 1, 0, 0)),
        Err(Error::InvalidConfiguration(_))
    ));

    r.ctrl
        .configure_config_window(4, CFG_BASE, CFG_SIZE, PciAddress::new(0, 1, 0, 0))
        .unwrap();
    r.ctrl.disable_window(Bank::Outbound, 4).unwrap();
    r.ccsr.clear_log();
    assert!(matches!(
        r.ctrl.retarget_config_window(4, PciAddress::new(0, 2, 0, 0)),
        Err(Error::InvalidConfiguration(_))
    ));
    assert_eq!(r.ccsr.writes(), 0);
}

#[test]
fn dump_is_silent_without_debug_logging() {
    let mut r = rc::<LittleEndian>();
    r.ctrl
        .configure_window(Bank::Outbound, 1, MEM, 0x40_0000_0000, 0, MIB)
        .unwrap();
    r.ccsr.clear_log();
    r.ctrl.dump_windows();
    assert!(r.ccsr.log().is_empty());
}
